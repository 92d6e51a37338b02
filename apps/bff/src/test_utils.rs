//! # テスト用スタブクライアント
//!
//! Users / Posts サービスのインメモリスタブ。
//! 呼び出し引数を記録し、テストから「何回・どの ID で呼ばれたか」を検証できる。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chirp_domain::{
    password::PasswordHash,
    post::{Comment, CommentId, LikeType, Post, PostId},
    user::{HashedNewUser, PartialUserUpdate, User, UserId},
};
use chrono::{DateTime, TimeZone, Utc};

use crate::client::{PostsServiceClient, ServiceError, UsersServiceClient};

/// テストデータの基準時刻
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
}

pub fn user(id: i32, name: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        ..Default::default()
    }
}

pub fn post(id: i32, user_id: i32) -> Post {
    Post {
        id: PostId::new(id),
        body: format!("post {id}"),
        created_at: test_time(),
        updated_at: test_time(),
        user_id: UserId::new(user_id),
        like_count: 0,
        is_current_user_like: false,
        user: User::default(),
        comments: Vec::new(),
    }
}

pub fn comment(id: i32, post_id: i32, user_id: i32) -> Comment {
    Comment {
        id:         CommentId::new(id),
        body:       format!("comment {id}"),
        created_at: test_time(),
        updated_at: test_time(),
        user_id:    UserId::new(user_id),
        post_id:    PostId::new(post_id),
        user:       User::default(),
    }
}

// ===== StubUsersServiceClient =====

#[derive(Clone, Default)]
pub struct StubUsersServiceClient {
    users:              Arc<Mutex<HashMap<UserId, User>>>,
    follow_result:      Arc<Mutex<bool>>,
    failure:            Arc<Mutex<Option<ServiceError>>>,
    fetch_by_ids_calls: Arc<Mutex<Vec<Vec<UserId>>>>,
    created:            Arc<Mutex<Vec<HashedNewUser>>>,
    updates:            Arc<Mutex<Vec<PartialUserUpdate>>>,
    follow_calls:       Arc<Mutex<Vec<(UserId, UserId)>>>,
    list_new_limits:    Arc<Mutex<Vec<u32>>>,
}

impl StubUsersServiceClient {
    pub fn new() -> Self {
        let stub = Self::default();
        *stub.follow_result.lock().unwrap() = true;
        stub
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let stub = Self::new();
        for user in users {
            stub.add_user(user);
        }
        stub
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// follow / unfollow が返す結果を設定する
    pub fn set_follow_result(&self, ok: bool) {
        *self.follow_result.lock().unwrap() = ok;
    }

    /// 以降のすべての呼び出しを失敗させる
    pub fn fail_with(&self, err: ServiceError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn fetch_by_ids_calls(&self) -> Vec<Vec<UserId>> {
        self.fetch_by_ids_calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<HashedNewUser> {
        self.created.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<PartialUserUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn follow_calls(&self) -> Vec<(UserId, UserId)> {
        self.follow_calls.lock().unwrap().clone()
    }

    pub fn list_new_limits(&self) -> Vec<u32> {
        self.list_new_limits.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn total_calls(&self) -> usize {
        self.fetch_by_ids_calls.lock().unwrap().len()
            + self.created.lock().unwrap().len()
            + self.updates.lock().unwrap().len()
            + self.follow_calls.lock().unwrap().len()
            + self.list_new_limits.lock().unwrap().len()
    }

    /// 記録対象の呼び出しが 1 度もないか
    pub fn was_untouched(&self) -> bool {
        self.total_calls() == 0
    }
}

#[async_trait]
impl UsersServiceClient for StubUsersServiceClient {
    async fn fetch_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, ServiceError> {
        self.fetch_by_ids_calls.lock().unwrap().push(ids.to_vec());
        self.check_failure()?;

        let users = self.users.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.check_failure()?;
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    async fn create(&self, user: &HashedNewUser) -> Result<User, ServiceError> {
        self.created.lock().unwrap().push(user.clone());
        self.check_failure()?;

        let mut users = self.users.lock().unwrap();
        let id = UserId::new(users.len() as i32 + 1);
        let created = User {
            id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: PasswordHash::new(user.password_hash.as_str()),
            ..Default::default()
        };
        users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_partial(&self, update: &PartialUserUpdate) -> Result<User, ServiceError> {
        self.updates.lock().unwrap().push(update.clone());
        self.check_failure()?;

        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&update.user_id).ok_or(ServiceError::NotFound)?;
        if let Some(name) = update.name.as_set() {
            user.name.clone_from(name);
        }
        if let Some(username) = update.username.as_set() {
            user.username.clone_from(username);
        }
        if let Some(bio) = update.bio.as_set() {
            user.bio.clone_from(bio);
        }
        if let Some(image) = update.profile_image.as_set() {
            user.profile_image.clone_from(image);
        }
        if let Some(image) = update.cover_image.as_set() {
            user.cover_image.clone_from(image);
        }
        Ok(user.clone())
    }

    async fn follow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        self.follow_calls.lock().unwrap().push((user_id, target));
        self.check_failure()?;

        let ok = *self.follow_result.lock().unwrap();
        if ok && let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.following_ids.push(target);
        }
        Ok(ok)
    }

    async fn unfollow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        self.follow_calls.lock().unwrap().push((user_id, target));
        self.check_failure()?;

        let ok = *self.follow_result.lock().unwrap();
        if ok && let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.following_ids.retain(|id| *id != target);
        }
        Ok(ok)
    }

    async fn list_new(&self, limit: u32) -> Result<Vec<User>, ServiceError> {
        self.list_new_limits.lock().unwrap().push(limit);
        self.check_failure()?;

        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        users.truncate(limit as usize);
        Ok(users)
    }
}

// ===== StubPostsServiceClient =====

/// `list_latest` に渡された引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPostsCall {
    pub author_ids:     Option<Vec<UserId>>,
    pub acting_user_id: Option<UserId>,
    pub limit:          u32,
}

#[derive(Clone, Default)]
pub struct StubPostsServiceClient {
    posts:              Arc<Mutex<Vec<Post>>>,
    like_results:       Arc<Mutex<Vec<bool>>>,
    failure:            Arc<Mutex<Option<ServiceError>>>,
    calls:              Arc<Mutex<usize>>,
    latest_calls:       Arc<Mutex<Vec<LatestPostsCall>>>,
    by_author_calls:    Arc<Mutex<Vec<UserId>>>,
    get_by_id_calls:    Arc<Mutex<Vec<(PostId, Option<UserId>)>>>,
    like_calls:         Arc<Mutex<Vec<(UserId, PostId, LikeType)>>>,
    created:            Arc<Mutex<Vec<(UserId, String)>>>,
}

impl StubPostsServiceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let stub = Self::new();
        stub.posts.lock().unwrap().extend(posts);
        stub
    }

    /// like が順に返す結果を設定する（使い切ったら `true`）
    pub fn set_like_results(&self, results: impl IntoIterator<Item = bool>) {
        *self.like_results.lock().unwrap() = results.into_iter().collect();
    }

    pub fn fail_with(&self, err: ServiceError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn latest_calls(&self) -> Vec<LatestPostsCall> {
        self.latest_calls.lock().unwrap().clone()
    }

    pub fn by_author_calls(&self) -> Vec<UserId> {
        self.by_author_calls.lock().unwrap().clone()
    }

    pub fn get_by_id_calls(&self) -> Vec<(PostId, Option<UserId>)> {
        self.get_by_id_calls.lock().unwrap().clone()
    }

    pub fn like_calls(&self) -> Vec<(UserId, PostId, LikeType)> {
        self.like_calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(UserId, String)> {
        self.created.lock().unwrap().clone()
    }

    fn begin_call(&self) -> Result<(), ServiceError> {
        *self.calls.lock().unwrap() += 1;
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostsServiceClient for StubPostsServiceClient {
    async fn create(&self, user_id: UserId, body: &str) -> Result<Post, ServiceError> {
        self.begin_call()?;
        self.created.lock().unwrap().push((user_id, body.to_string()));

        let mut posts = self.posts.lock().unwrap();
        let mut created = post(posts.len() as i32 + 1, user_id.as_i32());
        created.body = body.to_string();
        posts.push(created.clone());
        Ok(created)
    }

    async fn list_by_author(&self, user_id: UserId) -> Result<Vec<Post>, ServiceError> {
        self.begin_call()?;
        self.by_author_calls.lock().unwrap().push(user_id);

        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_latest(
        &self,
        author_ids: Option<&[UserId]>,
        acting_user_id: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<Post>, ServiceError> {
        self.begin_call()?;
        self.latest_calls.lock().unwrap().push(LatestPostsCall {
            author_ids: author_ids.map(<[UserId]>::to_vec),
            acting_user_id,
            limit,
        });

        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| author_ids.is_none_or(|ids| ids.contains(&p.user_id)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn get_by_id(
        &self,
        post_id: PostId,
        acting_user_id: Option<UserId>,
    ) -> Result<Post, ServiceError> {
        self.begin_call()?;
        self.get_by_id_calls
            .lock()
            .unwrap()
            .push((post_id, acting_user_id));

        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, ServiceError> {
        self.begin_call()?;

        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.comments.clone())
            .ok_or(ServiceError::NotFound)
    }

    async fn like(
        &self,
        user_id: UserId,
        post_id: PostId,
        operation: LikeType,
    ) -> Result<bool, ServiceError> {
        self.begin_call()?;
        self.like_calls
            .lock()
            .unwrap()
            .push((user_id, post_id, operation));

        let mut results = self.like_results.lock().unwrap();
        if results.is_empty() {
            Ok(true)
        } else {
            Ok(results.remove(0))
        }
    }
}

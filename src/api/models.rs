//! Entities returned by the remote service.
//!
//! Timestamps are Unix seconds.

use serde::{Deserialize, Serialize};

/// Authenticated identity held by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub link: String,
    pub bio: String,
    pub created_at: i64,
    pub last_seen_at: i64,
}

/// Follower or followed account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    pub mutuals: Vec<Follower>,
    pub follower_count: i64,
    pub is_following: bool,
}

/// Full user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub link: String,
    pub bio: String,
    pub created_at: i64,
    pub last_seen_at: i64,
    pub followers: Followers,
    pub blogs: Vec<UserBlog>,
    pub startups: Vec<UserStartup>,
}

/// Compact user reference used in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub follower_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: i64,
    pub option: String,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub options: Vec<PollOption>,
    pub my_vote_id: Option<i64>,
}

/// Blog post as listed on its author's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBlog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub poll: Option<Poll>,
    pub created_at: i64,
}

/// Blog post as listed in the global feed, joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub author_id: i64,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub follower_count: i64,
    pub blog_id: i64,
    pub title: String,
    pub content: String,
    pub poll: Option<Poll>,
    pub created_at: i64,
}

/// Startup as listed on a founder's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStartup {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub keynote: String,
    pub banner: String,
    pub founded_at: i64,
    pub created_at: i64,
    pub follower_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Founder {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub keynote: String,
    pub founded_at: i64,
    pub follower_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Startup {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub banner: String,
    pub founded_at: i64,
    pub created_at: i64,
    pub founders: Vec<Founder>,
    pub followers: Followers,
}

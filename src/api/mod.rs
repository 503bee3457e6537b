//! Typed bindings for the remote service.
//!
//! [`Api`] wraps a [`Transport`] with one async method per server method,
//! and [`Api::remote`] turns any method into a [`RemoteCall`] usable by a
//! [`Mutation`](crate::mutation::Mutation).

pub mod models;
pub mod params;
pub mod updates;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::mutation::RemoteCall;
use crate::transport::{CallFuture, RemoteCallResult, Transport, TransportFault};

pub use models::{
    Blog, Follower, Followers, Founder, Poll, PollOption, Session, Startup, User, UserBlog,
    UserHandle, UserStartup,
};
pub use params::*;

#[derive(Debug, Clone)]
pub struct Api {
    transport: Transport,
}

impl Api {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Bind `method` as a reusable remote call.
    pub fn remote<A, R>(&self, method: &'static str) -> RemoteCall<A, R>
    where
        A: Serialize + Send + Sync + 'static,
        R: DeserializeOwned + Send + 'static,
    {
        let transport = self.transport.clone();
        Arc::new(move |args: A| -> CallFuture<R> {
            let transport = transport.clone();
            Box::pin(async move { transport.call::<A, R>(method, &args).await })
        })
    }

    /// Return session user.
    pub async fn get_session(&self) -> Result<RemoteCallResult<Option<Session>>, TransportFault> {
        self.transport.call("get_session", &NoParameters {}).await
    }

    /// Logout from account.
    pub async fn logout(&self) -> Result<RemoteCallResult<()>, TransportFault> {
        self.transport.call("logout", &NoParameters {}).await
    }

    /// Get all blog posts.
    pub async fn get_blogs(&self) -> Result<RemoteCallResult<Vec<Blog>>, TransportFault> {
        self.transport.call("get_blogs", &NoParameters {}).await
    }

    /// Return top users.
    pub async fn top_users(&self) -> Result<RemoteCallResult<Vec<UserHandle>>, TransportFault> {
        self.transport.call("top_users", &NoParameters {}).await
    }
}

macro_rules! remote_methods {
    ($( $(#[$doc:meta])* $name:ident($params:ty) -> $ret:ty; )*) => {
        impl Api {
            $(
                $(#[$doc])*
                pub async fn $name(
                    &self,
                    params: &$params,
                ) -> Result<RemoteCallResult<$ret>, TransportFault> {
                    self.transport.call(stringify!($name), params).await
                }
            )*
        }
    };
}

remote_methods! {
    /// Login to account. `false` means the credentials were rejected.
    login(LoginParameters) -> bool;
    /// Register new user.
    register(RegisterParameters) -> bool;
    /// Change password, requires the old one and a logged-in user.
    set_password(SetPasswordParameters) -> bool;
    /// Change given details for user.
    update_user(UpdateUserParameters) -> ();
    follow_user(FollowUserParameters) -> ();
    unfollow_user(UnfollowUserParameters) -> ();
    /// Get all information about user.
    get_user(GetUserParameters) -> Option<User>;
    /// Find user by username.
    find_user(FindUserParameters) -> Option<UserHandle>;
    /// Create a blog post, returning its id.
    post_blog(PostBlogParameters) -> Option<i64>;
    delete_blog(DeleteBlogParameters) -> ();
    vote_poll(VotePollParameters) -> ();
    /// Create a startup, returning its id.
    create_startup(CreateStartupParameters) -> Option<i64>;
    /// Only founders can delete startups.
    delete_startup(DeleteStartupParameters) -> ();
    /// Only founders can edit startups.
    update_startup(UpdateStartupParameters) -> ();
    get_startup(GetStartupParameters) -> Option<Startup>;
    follow_startup(FollowStartupParameters) -> ();
    unfollow_startup(UnfollowStartupParameters) -> ();
    /// Fails if startup is not founded by current user.
    add_founder(AddFounderParameters) -> ();
    edit_founder(EditFounderParameters) -> ();
    /// Only founders can remove other founders.
    remove_founder(RemoveFounderParameters) -> ();
}

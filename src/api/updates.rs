//! Optimistic edits for the application's mutations.
//!
//! Each function has the shape `Fn(&mut Q, &Args) -> Result<(), UpdateError>`
//! expected by [`MutationOptions::update`](crate::mutation::MutationOptions::update),
//! where `Q` is the query's cached value. Entity queries resolve to `None`
//! when the entity does not exist, which every edit rejects up front.

use crate::api::models::{Founder, Poll, Startup, User};
use crate::api::params::{
    DeleteBlogParameters, EditFounderParameters, FollowStartupParameters, FollowUserParameters,
    RemoveFounderParameters, UnfollowStartupParameters, UnfollowUserParameters,
    UpdateStartupParameters, UpdateUserParameters, VotePollParameters,
};
use crate::mutation::UpdateError;

fn user(value: &mut Option<User>) -> Result<&mut User, UpdateError> {
    value.as_mut().ok_or(UpdateError::NotFound { entity: "User" })
}

fn startup(value: &mut Option<Startup>) -> Result<&mut Startup, UpdateError> {
    value.as_mut().ok_or(UpdateError::NotFound { entity: "Startup" })
}

fn founder(startup: &mut Startup, founder_id: i64) -> Result<&mut Founder, UpdateError> {
    startup
        .founders
        .iter_mut()
        .find(|founder| founder.id == founder_id)
        .ok_or(UpdateError::NotFound { entity: "Founder" })
}

pub fn follow_user(value: &mut Option<User>, _: &FollowUserParameters) -> Result<(), UpdateError> {
    let user = user(value)?;
    user.followers.follower_count += 1;
    user.followers.is_following = true;
    Ok(())
}

pub fn unfollow_user(
    value: &mut Option<User>,
    _: &UnfollowUserParameters,
) -> Result<(), UpdateError> {
    let user = user(value)?;
    user.followers.follower_count -= 1;
    user.followers.is_following = false;
    Ok(())
}

pub fn update_user(
    value: &mut Option<User>,
    params: &UpdateUserParameters,
) -> Result<(), UpdateError> {
    let user = user(value)?;
    user.name = params.name.clone();
    user.email = params.email.clone();
    user.avatar = params.avatar.clone();
    user.bio = params.bio.clone();
    user.link = params.link.clone();
    Ok(())
}

pub fn delete_blog(
    value: &mut Option<User>,
    params: &DeleteBlogParameters,
) -> Result<(), UpdateError> {
    let user = user(value)?;
    let index = user
        .blogs
        .iter()
        .position(|blog| blog.id == params.blog_id)
        .ok_or(UpdateError::NotFound { entity: "Blog" })?;
    user.blogs.remove(index);
    Ok(())
}

/// Move the session user's vote to `option_id`, withdrawing any earlier vote.
pub fn vote_poll(value: &mut Option<User>, params: &VotePollParameters) -> Result<(), UpdateError> {
    let user = user(value)?;
    let blog = user
        .blogs
        .iter_mut()
        .find(|blog| blog.id == params.blog_id)
        .ok_or(UpdateError::NotFound { entity: "Blog" })?;
    let poll = blog
        .poll
        .as_mut()
        .ok_or_else(|| UpdateError::Invalid("Blog has no poll".to_string()))?;
    apply_vote(poll, params.option_id)
}

fn apply_vote(poll: &mut Poll, option_id: i64) -> Result<(), UpdateError> {
    if let Some(previous) = poll.my_vote_id {
        let voted = poll
            .options
            .iter_mut()
            .find(|option| option.id == previous)
            .ok_or(UpdateError::NotFound {
                entity: "Voted option",
            })?;
        voted.votes -= 1;
    }
    let option = poll
        .options
        .iter_mut()
        .find(|option| option.id == option_id)
        .ok_or(UpdateError::NotFound { entity: "Option" })?;
    option.votes += 1;
    poll.my_vote_id = Some(option_id);
    Ok(())
}

pub fn update_startup(
    value: &mut Option<Startup>,
    params: &UpdateStartupParameters,
) -> Result<(), UpdateError> {
    let startup = startup(value)?;
    startup.name = params.name.clone();
    startup.description = params.description.clone();
    startup.banner = params.banner.clone();
    startup.founded_at = params.founded_at;
    Ok(())
}

pub fn follow_startup(
    value: &mut Option<Startup>,
    _: &FollowStartupParameters,
) -> Result<(), UpdateError> {
    startup(value)?.followers.is_following = true;
    Ok(())
}

pub fn unfollow_startup(
    value: &mut Option<Startup>,
    _: &UnfollowStartupParameters,
) -> Result<(), UpdateError> {
    startup(value)?.followers.is_following = false;
    Ok(())
}

pub fn edit_founder(
    value: &mut Option<Startup>,
    params: &EditFounderParameters,
) -> Result<(), UpdateError> {
    let founder = founder(startup(value)?, params.founder_id)?;
    founder.keynote = params.keynote.clone();
    founder.founded_at = params.founded_at;
    Ok(())
}

pub fn remove_founder(
    value: &mut Option<Startup>,
    params: &RemoveFounderParameters,
) -> Result<(), UpdateError> {
    let startup = startup(value)?;
    let index = startup
        .founders
        .iter()
        .position(|founder| founder.id == params.founder_id)
        .ok_or(UpdateError::NotFound { entity: "Founder" })?;
    startup.founders.remove(index);
    Ok(())
}

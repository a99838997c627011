use crate::constants::{INVITE_PATH, INVITE_QUERY_PARAM};
use crate::core::errors::PaytoolError;
use log::debug;
use url::Url;

/// Extract the group id from a shareable invite link. Both forms in
/// circulation are accepted: the path form `…/invite/{groupId}` and the
/// dashboard join form `…?groupId={id}`.
pub fn parse_invite_link(link: &str) -> Result<String, PaytoolError> {
    let url = Url::parse(link).map_err(|_| PaytoolError::InvalidInviteLink)?;

    if let Some((_, id)) = url
        .query_pairs()
        .find(|(key, value)| key == INVITE_QUERY_PARAM && !value.is_empty())
    {
        debug!("Invite link resolved via query param");
        return Ok(id.into_owned());
    }

    let mut segments = url
        .path_segments()
        .ok_or(PaytoolError::InvalidInviteLink)?
        .filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == INVITE_PATH {
            if let Some(id) = segments.next() {
                debug!("Invite link resolved via path");
                return Ok(id.to_string());
            }
        }
    }

    Err(PaytoolError::InvalidInviteLink)
}

/// Canonical shareable link for a group, in the path form.
pub fn invite_link(base: &str, group_id: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), INVITE_PATH, group_id)
}

use crate::error::{AppError, Result};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Resolves the vote an account holds after requesting `requested`.
///
/// Repeating the vote you already hold withdraws it; any other request replaces
/// whatever was there, so an account never holds a like and a dislike at once.
#[must_use]
pub fn next_vote(current: Option<VoteKind>, requested: VoteKind) -> Option<VoteKind> {
    if current == Some(requested) { None } else { Some(requested) }
}

/// Authors may not vote on their own posts.
///
/// # Errors
/// Returns `AppError::SelfInteraction` when `actor_id` wrote the post.
pub fn ensure_not_author(author_id: Uuid, actor_id: Uuid, kind: VoteKind) -> Result<()> {
    if author_id == actor_id {
        return Err(AppError::SelfInteraction(kind));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_toggle_sequence() {
        // like, like again, then dislike
        let after_like = next_vote(None, VoteKind::Like);
        assert_eq!(after_like, Some(VoteKind::Like));

        let after_unlike = next_vote(after_like, VoteKind::Like);
        assert_eq!(after_unlike, None);

        let after_dislike = next_vote(after_unlike, VoteKind::Dislike);
        assert_eq!(after_dislike, Some(VoteKind::Dislike));
    }

    #[test]
    fn test_switching_sides_replaces_vote() {
        assert_eq!(next_vote(Some(VoteKind::Like), VoteKind::Dislike), Some(VoteKind::Dislike));
        assert_eq!(next_vote(Some(VoteKind::Dislike), VoteKind::Like), Some(VoteKind::Like));
        assert_eq!(next_vote(Some(VoteKind::Dislike), VoteKind::Dislike), None);
    }

    #[test]
    fn test_author_cannot_vote() {
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(matches!(
            ensure_not_author(author, author, VoteKind::Dislike),
            Err(AppError::SelfInteraction(VoteKind::Dislike))
        ));
        assert!(ensure_not_author(author, other, VoteKind::Like).is_ok());
    }
}

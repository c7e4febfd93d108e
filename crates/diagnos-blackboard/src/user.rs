//! Contributor for user input.

use diagnos_core::Result;

use crate::contributor::{Contributor, ContributorId, ContributorKind};
use crate::fact::PropagationEntry;
use crate::session::Session;

/// Holds answers entered by the user. Last writer wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserContributor;

impl UserContributor {
    pub const NAME: &'static str = "user";
}

impl Contributor for UserContributor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> ContributorKind {
        ContributorKind::Source
    }

    fn priority(&self) -> u32 {
        0
    }

    fn propagate(
        &self,
        _session: &mut Session,
        _me: ContributorId,
        _changes: &[PropagationEntry],
    ) -> Result<()> {
        Ok(())
    }
}

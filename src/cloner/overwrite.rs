//! Permission-overwrite translation against the role mapping.

use std::collections::HashMap;

use crate::platform::types::{OverwriteInfo, PrincipalKind};

/// Source role id to newly created target role id, filled during the role
/// phase and read-only afterwards. Roles that failed to create simply have
/// no entry.
pub type RoleMapping = HashMap<u64, u64>;

/// Rewrites a source object's overwrites for the target server.
///
/// Role principals are rewritten through `mapping`; entries whose role never
/// made it into the mapping are dropped rather than emitted as dangling
/// references. Member principals pass through unchanged, on the assumption
/// that the same accounts exist in both servers. That assumption is not
/// verified anywhere; a member id that only exists in the source produces an
/// overwrite the platform will reject at creation time.
pub fn translate_overwrites(source: &[OverwriteInfo], mapping: &RoleMapping) -> Vec<OverwriteInfo> {
    source
        .iter()
        .filter_map(|overwrite| match overwrite.kind {
            PrincipalKind::Role => {
                mapping
                    .get(&overwrite.principal_id)
                    .map(|new_id| OverwriteInfo {
                        principal_id: *new_id,
                        ..overwrite.clone()
                    })
            }
            PrincipalKind::Member => Some(overwrite.clone()),
        })
        .collect()
}

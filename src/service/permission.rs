//! Channel permission projection.
//!
//! Computes the full overwrite set a ticket channel should carry for a given
//! lifecycle regime. The projection is a pure function of ticket state and
//! type configuration: applying the same regime twice yields the identical
//! set, so reapplication is a true no-op at the platform.

use serenity::all::{PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId};

/// Visibility regime implied by the ticket's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRegime {
    /// Live ticket: creator converses, support roles have full access.
    Open,
    /// Claimed ticket: support roles other than the claimer lose send access.
    Claimed { claimer: UserId },
    /// Closed/archived ticket: creator reads history, only support may write.
    Archived,
}

/// Identities the projection is computed over.
pub struct PermissionInputs<'a> {
    /// The guild's @everyone role (same id as the guild).
    pub everyone_role: RoleId,
    /// Ticket creator.
    pub creator: UserId,
    /// Support roles of the ticket's current type.
    pub support_roles: &'a [RoleId],
    /// The bot itself; it must never lock itself out of the channel.
    pub bot: UserId,
}

fn conversational() -> Permissions {
    Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::READ_MESSAGE_HISTORY
        | Permissions::ATTACH_FILES
        | Permissions::EMBED_LINKS
}

fn read_only() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY
}

fn support_full() -> Permissions {
    conversational() | Permissions::MANAGE_MESSAGES
}

fn bot_full() -> Permissions {
    conversational() | Permissions::MANAGE_CHANNELS | Permissions::MANAGE_MESSAGES
}

/// Computes the overwrite set for a regime.
///
/// # Arguments
/// - `regime` - Lifecycle regime to project
/// - `inputs` - Creator, support roles, bot and @everyone identities
///
/// # Returns
/// - `Vec<PermissionOverwrite>` - Complete overwrite set for the channel
pub fn project(regime: PermissionRegime, inputs: &PermissionInputs<'_>) -> Vec<PermissionOverwrite> {
    let mut overwrites = vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(inputs.everyone_role),
        },
        PermissionOverwrite {
            allow: bot_full(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(inputs.bot),
        },
    ];

    match regime {
        PermissionRegime::Open => {
            overwrites.push(PermissionOverwrite {
                allow: conversational(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(inputs.creator),
            });
            for role in inputs.support_roles {
                overwrites.push(PermissionOverwrite {
                    allow: support_full(),
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Role(*role),
                });
            }
        }
        PermissionRegime::Claimed { claimer } => {
            overwrites.push(PermissionOverwrite {
                allow: conversational(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(inputs.creator),
            });
            for role in inputs.support_roles {
                overwrites.push(PermissionOverwrite {
                    allow: read_only(),
                    deny: Permissions::SEND_MESSAGES,
                    kind: PermissionOverwriteType::Role(*role),
                });
            }
            overwrites.push(PermissionOverwrite {
                allow: support_full(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(claimer),
            });
        }
        PermissionRegime::Archived => {
            overwrites.push(PermissionOverwrite {
                allow: read_only(),
                deny: Permissions::SEND_MESSAGES,
                kind: PermissionOverwriteType::Member(inputs.creator),
            });
            for role in inputs.support_roles {
                overwrites.push(PermissionOverwrite {
                    allow: support_full(),
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Role(*role),
                });
            }
        }
    }

    overwrites
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(support: &[RoleId]) -> PermissionInputs<'_> {
        PermissionInputs {
            everyone_role: RoleId::new(900),
            creator: UserId::new(1),
            support_roles: support,
            bot: UserId::new(2),
        }
    }

    fn overwrite_for<'a>(
        set: &'a [PermissionOverwrite],
        kind: &PermissionOverwriteType,
    ) -> &'a PermissionOverwrite {
        set.iter()
            .find(|o| o.kind == *kind)
            .expect("overwrite missing")
    }

    #[test]
    fn everyone_is_denied_view_in_all_regimes() {
        let support = [RoleId::new(10)];
        for regime in [
            PermissionRegime::Open,
            PermissionRegime::Claimed {
                claimer: UserId::new(5),
            },
            PermissionRegime::Archived,
        ] {
            let set = project(regime, &inputs(&support));
            let everyone = overwrite_for(
                &set,
                &PermissionOverwriteType::Role(RoleId::new(900)),
            );

            assert!(everyone.deny.contains(Permissions::VIEW_CHANNEL));
            assert!(everyone.allow.is_empty());
        }
    }

    #[test]
    fn open_regime_lets_creator_and_support_send() {
        let support = [RoleId::new(10)];
        let set = project(PermissionRegime::Open, &inputs(&support));

        let creator = overwrite_for(&set, &PermissionOverwriteType::Member(UserId::new(1)));
        assert!(creator.allow.contains(Permissions::SEND_MESSAGES));

        let role = overwrite_for(&set, &PermissionOverwriteType::Role(RoleId::new(10)));
        assert!(role.allow.contains(Permissions::SEND_MESSAGES));
        assert!(role.allow.contains(Permissions::MANAGE_MESSAGES));
    }

    #[test]
    fn claimed_regime_strips_send_from_non_claimer_support() {
        let support = [RoleId::new(10), RoleId::new(11)];
        let claimer = UserId::new(5);
        let set = project(PermissionRegime::Claimed { claimer }, &inputs(&support));

        for role in &support {
            let overwrite = overwrite_for(&set, &PermissionOverwriteType::Role(*role));
            assert!(overwrite.deny.contains(Permissions::SEND_MESSAGES));
            assert!(overwrite.allow.contains(Permissions::VIEW_CHANNEL));
        }

        let claimer_overwrite = overwrite_for(&set, &PermissionOverwriteType::Member(claimer));
        assert!(claimer_overwrite.allow.contains(Permissions::SEND_MESSAGES));

        let creator = overwrite_for(&set, &PermissionOverwriteType::Member(UserId::new(1)));
        assert!(creator.allow.contains(Permissions::SEND_MESSAGES));
    }

    #[test]
    fn archived_regime_makes_creator_read_only() {
        let support = [RoleId::new(10)];
        let set = project(PermissionRegime::Archived, &inputs(&support));

        let creator = overwrite_for(&set, &PermissionOverwriteType::Member(UserId::new(1)));
        assert!(creator.allow.contains(Permissions::VIEW_CHANNEL));
        assert!(creator.allow.contains(Permissions::READ_MESSAGE_HISTORY));
        assert!(creator.deny.contains(Permissions::SEND_MESSAGES));

        let role = overwrite_for(&set, &PermissionOverwriteType::Role(RoleId::new(10)));
        assert!(role.allow.contains(Permissions::SEND_MESSAGES));
    }

    #[test]
    fn projection_is_deterministic() {
        let support = [RoleId::new(10)];
        let first = project(PermissionRegime::Open, &inputs(&support));
        let second = project(PermissionRegime::Open, &inputs(&support));

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.allow, b.allow);
            assert_eq!(a.deny, b.deny);
        }
    }
}

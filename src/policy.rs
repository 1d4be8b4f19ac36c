use crate::{
    filter::FilterToken,
    models::{Video, VideoPrivacy},
    privilege::PrivilegeLevel,
};

/// Origin
///
/// Which instances' videos a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Any,
    LocalOnly,
}

/// CorpusPredicate
///
/// The restriction an authorized filter places on which video records are eligible
/// for a listing. Endpoint scope (channel, account, ...) is applied separately by
/// the corpus; this only narrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPredicate {
    pub origin: Origin,
    pub privacies: Vec<VideoPrivacy>,
    pub include_unpublished: bool,
}

impl CorpusPredicate {
    /// Default visibility of a listing: published public videos from anywhere.
    pub fn default_visibility() -> Self {
        Self {
            origin: Origin::Any,
            privacies: vec![VideoPrivacy::Public],
            include_unpublished: false,
        }
    }

    /// Default visibility restricted to videos hosted here.
    pub fn local_public() -> Self {
        Self {
            origin: Origin::LocalOnly,
            ..Self::default_visibility()
        }
    }

    /// Every video hosted here, whatever its privacy or state.
    pub fn all_local() -> Self {
        Self {
            origin: Origin::LocalOnly,
            privacies: VideoPrivacy::ALL.to_vec(),
            include_unpublished: true,
        }
    }

    /// Replaces the privacy set, dropping duplicates.
    pub fn with_privacies(mut self, privacies: impl IntoIterator<Item = VideoPrivacy>) -> Self {
        self.privacies.clear();
        for privacy in privacies {
            if !self.privacies.contains(&privacy) {
                self.privacies.push(privacy);
            }
        }
        self
    }

    pub fn with_unpublished(mut self, include_unpublished: bool) -> Self {
        self.include_unpublished = include_unpublished;
        self
    }

    /// In-process evaluation of the predicate against a single record.
    pub fn matches(&self, video: &Video) -> bool {
        if self.origin == Origin::LocalOnly && !video.is_local {
            return false;
        }
        if !self.include_unpublished && !video.published {
            return false;
        }
        self.privacies.contains(&video.privacy)
    }
}

/// FilterRule
///
/// What a filter token costs (`required`) and what it yields (`predicate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub required: PrivilegeLevel,
    pub predicate: CorpusPredicate,
}

/// RejectionReason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidFilter,
    InsufficientPrivilege,
}

/// AuthorizationOutcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Authorized { predicate: CorpusPredicate },
    Rejected { reason: RejectionReason },
}

/// FilterPolicy
///
/// The rule table, one entry per `FilterToken`. Built once at startup and shared
/// read-only between all requests through `PolicyState`.
///
/// Privilege requirements are fixed: `None` and `Local` are open to anyone,
/// `AllLocal` needs a moderator. Only the predicates are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    none: FilterRule,
    local: FilterRule,
    all_local: FilterRule,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new(CorpusPredicate::all_local())
    }
}

impl FilterPolicy {
    /// Builds the table with a custom predicate for `all-local`. `origin` is forced
    /// to `LocalOnly` whatever the caller passes, the token would be meaningless otherwise.
    pub fn new(all_local: CorpusPredicate) -> Self {
        Self {
            none: FilterRule {
                required: PrivilegeLevel::Anonymous,
                predicate: CorpusPredicate::default_visibility(),
            },
            local: FilterRule {
                required: PrivilegeLevel::Anonymous,
                predicate: CorpusPredicate::local_public(),
            },
            all_local: FilterRule {
                required: PrivilegeLevel::Moderator,
                predicate: CorpusPredicate {
                    origin: Origin::LocalOnly,
                    ..all_local
                },
            },
        }
    }

    pub fn rule(&self, token: FilterToken) -> &FilterRule {
        match token {
            FilterToken::None => &self.none,
            FilterToken::Local => &self.local,
            FilterToken::AllLocal => &self.all_local,
        }
    }

    /// authorize
    ///
    /// Grants the rule's predicate when `level` meets the rule's requirement. The
    /// comparison is purely ordinal: there are no per-role exceptions.
    pub fn authorize(&self, token: FilterToken, level: PrivilegeLevel) -> AuthorizationOutcome {
        let rule = self.rule(token);

        if level.satisfies(rule.required) {
            AuthorizationOutcome::Authorized {
                predicate: rule.predicate.clone(),
            }
        } else {
            AuthorizationOutcome::Rejected {
                reason: RejectionReason::InsufficientPrivilege,
            }
        }
    }
}

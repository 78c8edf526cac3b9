//! Stock rules used by deployments and tests
//!
//! Record rules read well-known fields out of the opaque record value;
//! resource rules inspect the leaf itself.

use chrono::{DateTime, Utc};
use palisade_types::{Context, LeafResource, Record, Rule, User};

/// Keeps a record only when the user holds its visibility label.
///
/// Reads the record's `visibility` field; records without one are visible
/// to nobody.
pub struct IsVisible;

impl Rule<Record> for IsVisible {
    fn apply(&self, record: Record, user: &User, _: &Context) -> Option<Record> {
        let visibility = record.field("visibility")?.as_str()?.to_string();
        user.has_auth(&visibility).then_some(record)
    }
}

/// Ages off records older than a cut-off timestamp.
///
/// Reads the record's `timestamp` field as RFC 3339; unparseable records
/// are dropped.
pub struct AgeOff {
    earliest: DateTime<Utc>,
}

impl AgeOff {
    pub fn since(earliest: DateTime<Utc>) -> Self {
        Self { earliest }
    }
}

impl Rule<Record> for AgeOff {
    fn apply(&self, record: Record, _: &User, _: &Context) -> Option<Record> {
        let raw = record.field("timestamp")?.as_str()?;
        let timestamp = DateTime::parse_from_rfc3339(raw).ok()?;
        (timestamp.with_timezone(&Utc) >= self.earliest).then_some(record)
    }
}

/// Keeps only leaves stored in the given serialised format.
pub struct HasSerialisedFormat {
    format: String,
}

impl HasSerialisedFormat {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Rule<LeafResource> for HasSerialisedFormat {
    fn apply(&self, leaf: LeafResource, _: &User, _: &Context) -> Option<LeafResource> {
        (leaf.serialised_format == self.format).then_some(leaf)
    }
}

/// Keeps only leaves visible to users holding the given role.
pub struct RequiresRole {
    role: String,
}

impl RequiresRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Rule<LeafResource> for RequiresRole {
    fn apply(&self, leaf: LeafResource, user: &User, _: &Context) -> Option<LeafResource> {
        user.has_role(&self.role).then_some(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(json: serde_json::Value) -> Record {
        Record(json)
    }

    #[test]
    fn test_visibility_against_auths() {
        let user = User::new("alice").with_auths(["public"]);
        let ctx = Context::new("test");

        let public = record(serde_json::json!({ "visibility": "public", "n": 1 }));
        let private = record(serde_json::json!({ "visibility": "private", "n": 2 }));
        let unlabelled = record(serde_json::json!({ "n": 3 }));

        assert!(IsVisible.apply(public, &user, &ctx).is_some());
        assert!(IsVisible.apply(private, &user, &ctx).is_none());
        assert!(IsVisible.apply(unlabelled, &user, &ctx).is_none());
    }

    #[test]
    fn test_age_off() {
        let user = User::new("alice");
        let ctx = Context::new("test");
        let rule = AgeOff::since(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let fresh = record(serde_json::json!({ "timestamp": "2023-06-01T12:00:00Z" }));
        let stale = record(serde_json::json!({ "timestamp": "2019-06-01T12:00:00Z" }));
        let mangled = record(serde_json::json!({ "timestamp": "yesterday" }));

        assert!(rule.apply(fresh, &user, &ctx).is_some());
        assert!(rule.apply(stale, &user, &ctx).is_none());
        assert!(rule.apply(mangled, &user, &ctx).is_none());
    }

    #[test]
    fn test_resource_rules() {
        let admin = User::new("alice").with_roles(["admin"]);
        let ctx = Context::new("test");
        let leaf = LeafResource::new("/hr/contacts", "employee", "avro");

        assert!(HasSerialisedFormat::new("avro")
            .apply(leaf.clone(), &admin, &ctx)
            .is_some());
        assert!(HasSerialisedFormat::new("csv")
            .apply(leaf.clone(), &admin, &ctx)
            .is_none());
        assert!(RequiresRole::new("admin").apply(leaf.clone(), &admin, &ctx).is_some());
        assert!(RequiresRole::new("auditor").apply(leaf, &admin, &ctx).is_none());
    }
}

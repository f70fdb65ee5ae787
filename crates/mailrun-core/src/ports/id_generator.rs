//! IdGenerator port - ID 生成の抽象化
//!
//! - 成果物 ID: UUID v4（ファイル名の一意性）
//! - Content-ID: Clock の時刻 + 乱数で ULID を作り、送信者のドメインを付ける

use crate::domain::ids::{ArtifactId, ContentId};
use crate::ports::Clock;
use ulid::Ulid;
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn artifact_id(&self) -> ArtifactId;

    fn content_id(&self, domain: &str) -> ContentId;
}

pub struct UuidUlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UuidUlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UuidUlidGenerator<C> {
    fn artifact_id(&self) -> ArtifactId {
        ArtifactId::from(Uuid::new_v4())
    }

    fn content_id(&self, domain: &str) -> ContentId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        ContentId::new(ulid, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};

    #[test]
    fn artifact_ids_are_unique() {
        let ids = UuidUlidGenerator::new(SystemClock);
        let a = ids.artifact_id();
        let b = ids.artifact_id();
        assert_ne!(a, b);
    }

    #[test]
    fn content_ids_share_timestamp_under_fixed_clock() {
        let clock = FixedClock::on_date(2024, 1, 1).unwrap();
        let ids = UuidUlidGenerator::new(clock);

        let c1 = ids.content_id("example.org");
        let c2 = ids.content_id("example.org");
        assert_ne!(c1, c2);

        let ulid_of = |cid: &ContentId| {
            let raw = cid.as_str().split('@').next().unwrap().to_string();
            Ulid::from_string(&raw).unwrap()
        };
        assert_eq!(ulid_of(&c1).timestamp_ms(), ulid_of(&c2).timestamp_ms());
        assert_eq!(
            ulid_of(&c1).timestamp_ms(),
            clock.now().timestamp_millis() as u64
        );
        assert!(c1.as_str().ends_with("@example.org"));
    }
}

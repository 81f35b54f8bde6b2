//! Property-based serialization round-trip tests.
//!
//! Uses proptest to verify:
//! 1. Any valid `Task` survives a JSON serialize → deserialize round-trip.
//! 2. The same holds for index slices and error bodies.
//! 3. Arbitrary input never causes a panic when parsed as a `Task`
//!    (deserialization returns `Err` gracefully).

use proptest::prelude::*;
use taskboard_proto::api::{ErrorBody, ErrorKind};
use taskboard_proto::category::{Category, CategoryId};
use taskboard_proto::task::{Bucket, Task, TaskId, TaskPatch};
use taskboard_proto::user::CategoryIndex;
use uuid::Uuid;

// --- Arbitrary implementations for protocol types ---

/// Strategy for generating arbitrary `TaskId` values.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating arbitrary `Bucket` values.
fn arb_bucket() -> impl Strategy<Value = Bucket> {
    prop_oneof![
        Just(Bucket::ToDo),
        Just(Bucket::InProgress),
        Just(Bucket::Done),
    ]
}

/// Strategy for generating arbitrary `Task` values.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        arb_task_id(),
        "[a-z0-9.@-]{3,40}",
        "[^\x00]{1,256}",
        ".{0,512}",
        any::<u64>(),
        arb_bucket(),
    )
        .prop_map(|(id, owner_email, title, description, deadline, category)| Task {
            id,
            owner_email,
            title,
            description,
            deadline,
            category,
        })
}

/// Strategy for generating arbitrary `TaskPatch` values.
fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        prop::option::of(".{0,64}"),
        prop::option::of(".{0,64}"),
        prop::option::of(any::<u64>()),
    )
        .prop_map(|(title, description, deadline)| TaskPatch {
            title,
            description,
            deadline,
        })
}

/// Strategy for generating arbitrary `CategoryIndex` values.
fn arb_index() -> impl Strategy<Value = CategoryIndex> {
    (
        prop::collection::vec(arb_task_id(), 0..8),
        prop::collection::vec(arb_task_id(), 0..8),
        prop::collection::vec(arb_task_id(), 0..8),
    )
        .prop_map(|(to_do, in_progress, done)| CategoryIndex {
            to_do,
            in_progress,
            done,
        })
}

/// Strategy for generating arbitrary `ErrorKind` values.
fn arb_error_kind() -> impl Strategy<Value = ErrorKind> {
    prop_oneof![
        Just(ErrorKind::Unauthorized),
        Just(ErrorKind::Forbidden),
        Just(ErrorKind::TaskNotFound),
        Just(ErrorKind::UserNotFound),
        Just(ErrorKind::CategoryNotFound),
        Just(ErrorKind::Conflict),
        Just(ErrorKind::InvalidRequest),
        Just(ErrorKind::PartialInconsistency),
        Just(ErrorKind::ServerError),
    ]
}

/// Strategy for generating arbitrary `ErrorBody` values.
fn arb_error_body() -> impl Strategy<Value = ErrorBody> {
    (
        arb_error_kind(),
        ".{0,128}",
        prop::collection::vec("[a-z_]{1,20}", 0..3),
    )
        .prop_map(|(kind, message, completed_steps)| ErrorBody {
            kind,
            message,
            completed_steps,
        })
}

// --- Property tests ---

proptest! {
    /// Any valid Task survives a JSON round-trip.
    #[test]
    fn task_round_trip(task in arb_task()) {
        let json = serde_json::to_string(&task).expect("serialize should succeed");
        let back: Task = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(back, task);
    }

    /// Any valid TaskPatch survives a JSON round-trip and `is_empty`
    /// agrees with the field contents.
    #[test]
    fn patch_round_trip(patch in arb_patch()) {
        let json = serde_json::to_string(&patch).expect("serialize should succeed");
        let back: TaskPatch = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(
            back.is_empty(),
            back.title.is_none() && back.description.is_none() && back.deadline.is_none()
        );
        prop_assert_eq!(back, patch);
    }

    /// Any valid CategoryIndex survives a JSON round-trip with bucket
    /// order preserved.
    #[test]
    fn index_round_trip(index in arb_index()) {
        let json = serde_json::to_string(&index).expect("serialize should succeed");
        let back: CategoryIndex = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(back, index);
    }

    /// Any valid ErrorBody survives a JSON round-trip, including the
    /// empty-completed-steps omission.
    #[test]
    fn error_body_round_trip(body in arb_error_body()) {
        let json = serde_json::to_string(&body).expect("serialize should succeed");
        let back: ErrorBody = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(back, body);
    }

    /// Categories round-trip through JSON.
    #[test]
    fn category_round_trip(n in any::<u128>(), name in ".{1,64}") {
        let category = Category { id: CategoryId::from_uuid(Uuid::from_u128(n)), name };
        let json = serde_json::to_string(&category).expect("serialize should succeed");
        let back: Category = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(back, category);
    }

    /// Arbitrary input never panics the Task deserializer.
    #[test]
    fn garbage_never_panics(input in ".{0,256}") {
        let _ = serde_json::from_str::<Task>(&input);
    }

    /// A bucket's wire name always parses back to the same bucket.
    #[test]
    fn bucket_name_round_trip(bucket in arb_bucket()) {
        prop_assert_eq!(Bucket::from_name(bucket.name()), Some(bucket));
        let json = serde_json::to_string(&bucket).expect("serialize should succeed");
        let back: Bucket = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(back, bucket);
    }
}

pub mod task_id;
pub mod validated_json;

pub use task_id::TaskId;
pub use validated_json::ValidatedJson;

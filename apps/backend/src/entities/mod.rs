pub mod tasks;

pub use tasks::Entity as Tasks;
pub use tasks::Model as Task;
pub use tasks::TaskStatus;

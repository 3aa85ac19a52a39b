pub mod lamellae;
pub mod walk;

// Pipelines: end-to-end flows built from the collaborators and the trait core.

pub mod compare;

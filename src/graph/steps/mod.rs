//! The four workflow steps, each delegating to one collaborator seam.

mod generate;
mod grade;
mod no_answer;
mod retrieve;

pub use generate::GenerateStep;
pub use grade::GradeDocumentsStep;
pub use no_answer::HandleNoAnswerStep;
pub use retrieve::RetrieveStep;

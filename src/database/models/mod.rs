pub mod career;
pub mod curso;
pub mod enrollment;
pub mod payment;
pub mod user;

pub use career::Career;
pub use curso::{Curso, CursoWithCareer};
pub use enrollment::{Enrollment, EnrolledCurso};
pub use payment::{Payment, PaymentListRow, PaymentView};
pub use user::{User, UserListRow, UserProfile};

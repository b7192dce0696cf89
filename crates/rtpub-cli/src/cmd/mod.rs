pub mod generate;
pub mod inspect;
pub mod list;
pub mod publish;

pub mod taskmodel;
pub mod usermodel;

use crate::decode::DecodeError;
use crate::export::ExportError;
use crate::session::SessionError;
use crate::shell::ShellError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Shell(#[from] ShellError),
}

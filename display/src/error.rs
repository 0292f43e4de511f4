use sdl2::render::TextureValueError;
use sdl2::video::WindowBuildError;
use sdl2::IntegerOrSdlError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// SDL reports most failures as bare strings
    #[error("sdl error: {0}")]
    Sdl(String),

    #[error("unable to build window: {0}")]
    Window(#[from] WindowBuildError),

    #[error("unable to build canvas: {0}")]
    Canvas(#[from] IntegerOrSdlError),

    #[error("unable to create texture: {0}")]
    Texture(#[from] TextureValueError),
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Sdl(message)
    }
}

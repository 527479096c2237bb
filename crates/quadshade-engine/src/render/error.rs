use thiserror::Error;

use super::uniforms::UniformKind;

/// Shader stage, used in diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The shader pair could not be turned into a program. Fatal for the plugin.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderCompileError {
    #[error("{stage} shader failed to parse:\n{message}")]
    Parse { stage: ShaderStage, message: String },

    #[error("{stage} shader failed validation: {message}")]
    Validation { stage: ShaderStage, message: String },

    #[error("{stage} shader has no entry point `{entry_point}`")]
    MissingEntryPoint {
        stage: ShaderStage,
        entry_point: &'static str,
    },

    #[error("vertex and fragment stages declare different uniform blocks")]
    UniformBlockMismatch,

    #[error("uniform `{name}` has unsupported type `{ty}`")]
    UnsupportedUniform { name: String, ty: String },
}

/// A uniform write was rejected by the live uniform table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UniformError {
    #[error("program declares no uniform named `{name}`")]
    Unknown { name: String },

    #[error("uniform `{name}` is {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

/// The backend could not issue a draw.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    #[error("draw issued outside of a frame")]
    NoFrame,
    #[error("draw issued without a bound program and vertex array")]
    NothingBound,
}

/// Failure while (re)initializing a plugin for a new graphics context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextInitError {
    #[error("plugin `{plugin}`: {source}")]
    Compile {
        plugin: String,
        #[source]
        source: ShaderCompileError,
    },
    #[error("plugin `{plugin}` default uniforms: {source}")]
    Defaults {
        plugin: String,
        #[source]
        source: UniformError,
    },
}

/// Failure while rendering one object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("plugin `{0}` rendered before its context was initialized")]
    NotInitialized(String),
    #[error("no plugin registered under handle {0}")]
    UnknownPlugin(usize),
    #[error(transparent)]
    Uniform(#[from] UniformError),
    #[error(transparent)]
    Draw(#[from] DrawError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a plugin named `{0}` is already registered")]
    DuplicateName(String),
}

//! Picks the input and output folders, asking on the terminal for any not given as flags.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("No photo folder was chosen")]
    InputNotChosen,

    #[error("No output folder was chosen")]
    OutputNotChosen,

    #[error("Not an existing folder: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Could not read the answer: {0}")]
    Io(#[from] io::Error),
}

/// The two folders a run works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderChoice {
    pub input: PathBuf,
    pub output: PathBuf,
}

fn ask(
    prompt: &str,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<Option<PathBuf>, ShellError> {
    write!(writer, "{prompt}: ")?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

fn existing_dir(path: PathBuf) -> Result<PathBuf, ShellError> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(ShellError::NotADirectory(path))
    }
}

/// Resolves both folders. Flags win; missing ones are asked for.
///
/// The photo folder must exist. The output folder must exist too, unless it was given
/// on the command line, in which case it is created when the report is written.
///
/// # Errors
///
/// An empty answer means the folder was not chosen and aborts the run, as does a
/// photo folder that is not a directory.
pub fn choose_folders(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    mut reader: impl BufRead,
    mut writer: impl Write,
) -> Result<FolderChoice, ShellError> {
    let input = match input {
        Some(path) => path,
        None => ask("Folder with photos", &mut reader, &mut writer)?
            .ok_or(ShellError::InputNotChosen)?,
    };
    let input = existing_dir(input)?;

    let output = match output {
        Some(path) => path,
        None => existing_dir(
            ask("Folder to save the report in", &mut reader, &mut writer)?
                .ok_or(ShellError::OutputNotChosen)?,
        )?,
    };

    Ok(FolderChoice { input, output })
}

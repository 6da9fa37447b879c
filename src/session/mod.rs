//! The study library behind the persistence boundary: folder → course →
//! subject hierarchy with find-or-create semantics, study sessions with
//! active-session bookkeeping, and the captures the overlay submits.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::selection::Difficulty;

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session to receive the capture")]
    NoActiveSession,
    #[error("unknown {entity} id {id}")]
    UnknownId { entity: &'static str, id: u64 },
    #[error("screenshot submission missing or malformed field {0}")]
    MalformedSubmission(&'static str),
    #[error("difficulty rating {0} outside 1..=4")]
    InvalidDifficulty(u64),
    #[error("library io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("library serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub folder_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    pub course_id: u64,
    pub name: String,
}

/// A study session binding a name to a folder/course/subject triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: u64,
    pub name: String,
    pub folder_id: u64,
    pub course_id: u64,
    pub subject_id: u64,
    pub created_at: u64,
}

/// One capture as durably recorded by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCapture {
    pub id: u64,
    pub subject_id: u64,
    pub difficulty: Difficulty,
    pub image_url: String,
    pub created_at: u64,
}

/// The parsed `receive_screenshot_data` wire arguments. Linkage ids are
/// null when the overlay defers to the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotSubmission {
    pub image_url: String,
    pub folder_id: Option<u64>,
    pub course_id: Option<u64>,
    pub subject_id: Option<u64>,
    pub difficulty: Difficulty,
}

impl ScreenshotSubmission {
    pub fn from_args(args: &Value) -> SessionResult<Self> {
        let image_url = args
            .get("imageUrl")
            .and_then(Value::as_str)
            .ok_or(SessionError::MalformedSubmission("imageUrl"))?
            .to_owned();
        let rating = args
            .get("difficultyRating")
            .and_then(Value::as_u64)
            .ok_or(SessionError::MalformedSubmission("difficultyRating"))?;
        let difficulty = u8::try_from(rating)
            .ok()
            .and_then(Difficulty::from_rating)
            .ok_or(SessionError::InvalidDifficulty(rating))?;

        Ok(Self {
            image_url,
            folder_id: optional_id(args, "folderId")?,
            course_id: optional_id(args, "courseId")?,
            subject_id: optional_id(args, "setId")?,
            difficulty,
        })
    }
}

fn optional_id(args: &Value, field: &'static str) -> SessionResult<Option<u64>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or(SessionError::MalformedSubmission(field)),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StudyLibrary {
    next_id: u64,
    folders: Vec<Folder>,
    courses: Vec<Course>,
    subjects: Vec<Subject>,
    sessions: Vec<StudySession>,
    captures: Vec<SavedCapture>,
    active_session_id: Option<u64>,
}

impl StudyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a previously saved library. A missing file yields an empty
    /// library rather than an error.
    pub fn load_from_file(path: &Path) -> SessionResult<Self> {
        if !path.exists() {
            tracing::info!(?path, "no session file; starting with an empty library");
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_file(&self, path: &Path) -> SessionResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.next_id
    }

    /// Reuses an existing folder by name (case-insensitive) or creates it.
    pub fn find_or_create_folder(&mut self, name: &str) -> u64 {
        if let Some(folder) = self
            .folders
            .iter()
            .find(|folder| folder.name.eq_ignore_ascii_case(name))
        {
            return folder.id;
        }
        let id = self.allocate_id();
        self.folders.push(Folder {
            id,
            name: name.to_owned(),
        });
        id
    }

    pub fn find_or_create_course(&mut self, folder_id: u64, name: &str) -> SessionResult<u64> {
        self.require_folder(folder_id)?;
        if let Some(course) = self
            .courses
            .iter()
            .find(|course| course.folder_id == folder_id && course.name.eq_ignore_ascii_case(name))
        {
            return Ok(course.id);
        }
        let id = self.allocate_id();
        self.courses.push(Course {
            id,
            folder_id,
            name: name.to_owned(),
        });
        Ok(id)
    }

    pub fn find_or_create_subject(&mut self, course_id: u64, name: &str) -> SessionResult<u64> {
        self.require_course(course_id)?;
        if let Some(subject) = self
            .subjects
            .iter()
            .find(|subject| {
                subject.course_id == course_id && subject.name.eq_ignore_ascii_case(name)
            })
        {
            return Ok(subject.id);
        }
        let id = self.allocate_id();
        self.subjects.push(Subject {
            id,
            course_id,
            name: name.to_owned(),
        });
        Ok(id)
    }

    /// Creates a session over an existing hierarchy triple, optionally
    /// starting it immediately.
    pub fn create_session(
        &mut self,
        name: &str,
        folder_id: u64,
        course_id: u64,
        subject_id: u64,
        start_immediately: bool,
    ) -> SessionResult<u64> {
        self.require_folder(folder_id)?;
        self.require_course(course_id)?;
        self.require_subject(subject_id)?;

        let id = self.allocate_id();
        self.sessions.push(StudySession {
            id,
            name: name.to_owned(),
            folder_id,
            course_id,
            subject_id,
            created_at: epoch_seconds(),
        });
        if start_immediately {
            self.active_session_id = Some(id);
        }
        tracing::info!(session = name, id, "session created");
        Ok(id)
    }

    pub fn start_session(&mut self, session_id: u64) -> SessionResult<()> {
        let session = self
            .sessions
            .iter()
            .find(|session| session.id == session_id)
            .ok_or(SessionError::UnknownId {
                entity: "session",
                id: session_id,
            })?;
        tracing::info!(session = %session.name, "session started");
        self.active_session_id = Some(session_id);
        Ok(())
    }

    pub fn end_session(&mut self) {
        if let Some(id) = self.active_session_id.take() {
            tracing::info!(id, "session ended");
        }
    }

    pub fn delete_session(&mut self, session_id: u64) -> SessionResult<()> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.id == session_id)
            .ok_or(SessionError::UnknownId {
                entity: "session",
                id: session_id,
            })?;
        self.sessions.remove(index);
        if self.active_session_id == Some(session_id) {
            self.active_session_id = None;
        }
        Ok(())
    }

    pub fn active_session(&self) -> Option<&StudySession> {
        self.active_session_id
            .and_then(|id| self.sessions.iter().find(|session| session.id == id))
    }

    pub fn session_by_id(&self, session_id: u64) -> Option<&StudySession> {
        self.sessions.iter().find(|session| session.id == session_id)
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    /// Duplicate-context probe used by the session UI before creating.
    pub fn session_exists_for_context(
        &self,
        folder_id: u64,
        course_id: u64,
        subject_id: u64,
    ) -> bool {
        self.sessions.iter().any(|session| {
            session.folder_id == folder_id
                && session.course_id == course_id
                && session.subject_id == subject_id
        })
    }

    /// Records a capture submitted through the overlay boundary. Null
    /// linkage resolves through the active session; submitting with no
    /// active session is refused.
    pub fn receive_screenshot(
        &mut self,
        submission: ScreenshotSubmission,
    ) -> SessionResult<SavedCapture> {
        let subject_id = match submission.subject_id {
            Some(subject_id) => {
                self.require_subject(subject_id)?;
                subject_id
            }
            None => {
                self.active_session()
                    .ok_or(SessionError::NoActiveSession)?
                    .subject_id
            }
        };

        let id = self.allocate_id();
        let capture = SavedCapture {
            id,
            subject_id,
            difficulty: submission.difficulty,
            image_url: submission.image_url,
            created_at: epoch_seconds(),
        };
        self.captures.push(capture.clone());
        tracing::info!(
            capture = id,
            subject = subject_id,
            rating = capture.difficulty.rating(),
            "capture recorded"
        );
        Ok(capture)
    }

    pub fn captures_for_subject(&self, subject_id: u64) -> Vec<&SavedCapture> {
        self.captures
            .iter()
            .filter(|capture| capture.subject_id == subject_id)
            .collect()
    }

    fn require_folder(&self, id: u64) -> SessionResult<()> {
        self.folders
            .iter()
            .any(|folder| folder.id == id)
            .then_some(())
            .ok_or(SessionError::UnknownId {
                entity: "folder",
                id,
            })
    }

    fn require_course(&self, id: u64) -> SessionResult<()> {
        self.courses
            .iter()
            .any(|course| course.id == id)
            .then_some(())
            .ok_or(SessionError::UnknownId {
                entity: "course",
                id,
            })
    }

    fn require_subject(&self, id: u64) -> SessionResult<()> {
        self.subjects
            .iter()
            .any(|subject| subject.id == id)
            .then_some(())
            .ok_or(SessionError::UnknownId {
                entity: "subject",
                id,
            })
    }
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, WriterBuilder};

use crate::{
    error::{AppError, AppResult},
    models::Reservation,
};

/// Append-only reservation log backed by a CSV file
///
/// The header row is written when the file is created or empty. Writers are
/// not coordinated with each other.
#[derive(Debug, Clone)]
pub struct ReservationLog {
    path: PathBuf,
}

impl ReservationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one reservation as a new row
    pub fn append(&self, reservation: &Reservation) -> AppResult<()> {
        let write_failed = |e: &dyn std::fmt::Display| {
            AppError::ReservationWriteFailed(format!("{}: {}", self.path.display(), e))
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| write_failed(&e))?;
        let needs_header = file.metadata().map_err(|e| write_failed(&e))?.len() == 0;

        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(reservation).map_err(|e| write_failed(&e))?;
        writer.flush().map_err(|e| write_failed(&e))?;

        tracing::info!(
            reservation_id = %reservation.reservation_id,
            listing_id = reservation.listing_id,
            username = %reservation.username,
            "Reservation appended"
        );

        Ok(())
    }

    /// Reads every row in file order; a missing file is an empty log
    pub fn read_all(&self) -> AppResult<Vec<Reservation>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::malformed(&self.path, e.to_string())),
        };

        ReaderBuilder::new()
            .from_reader(file)
            .deserialize()
            .collect::<Result<Vec<Reservation>, _>>()
            .map_err(|e| AppError::malformed(&self.path, e.to_string()))
    }

    /// Reservations made by `username`, newest first
    pub fn for_user(&self, username: &str) -> AppResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.username == username)
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    /// Truncates the log
    pub fn reset(&self) -> AppResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::write(&self.path, b"").map_err(|e| {
            AppError::ReservationWriteFailed(format!("{}: {}", self.path.display(), e))
        })?;
        tracing::warn!(path = %self.path.display(), "Reservation log reset");
        Ok(())
    }
}

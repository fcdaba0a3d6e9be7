use std::sync::Arc;

use crate::entities::{Student, StudentStatus};
use crate::record_store::{RecordStoreClient, StoreError};

use super::SheetRepository;

#[derive(Clone)]
pub struct StudentRepository {
    sheet: SheetRepository<Student>,
}

impl StudentRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    /// Every row, deleted students included.
    pub async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
        self.sheet.find_all().await
    }

    pub async fn find_active(&self) -> Result<Vec<Student>, StoreError> {
        let students = self.find_all().await?;
        Ok(students.into_iter().filter(Student::is_active).collect())
    }

    pub async fn find_by_id(&self, student_id: i64) -> Result<Option<Student>, StoreError> {
        self.sheet.find_by_key(&student_id.to_string()).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Student>, StoreError> {
        let email = email.trim().to_lowercase();
        let students = self.find_active().await?;
        Ok(students.into_iter().find(|s| s.email == email))
    }

    /// Ids are never reused, so deleted rows count too.
    pub async fn next_id(&self) -> Result<i64, StoreError> {
        let students = self.find_all().await?;
        Ok(students.iter().map(|s| s.id).max().unwrap_or(0) + 1)
    }

    pub async fn create(&self, student: &Student) -> Result<(), StoreError> {
        self.sheet.insert(student).await
    }

    pub async fn update(&self, student: &Student) -> Result<bool, StoreError> {
        self.sheet.update(student).await
    }

    /// Marks the row deleted; the row itself stays.
    pub async fn soft_delete(&self, student_id: i64) -> Result<Option<Student>, StoreError> {
        let Some(mut student) = self.find_by_id(student_id).await? else {
            return Ok(None);
        };
        student.status = StudentStatus::Deleted;
        self.sheet.update(&student).await?;
        Ok(Some(student))
    }

    /// Read-modify-write of the points cell. Returns the new total.
    pub async fn add_points(&self, student_id: i64, points: i64) -> Result<Option<i64>, StoreError> {
        let Some(mut student) = self.find_by_id(student_id).await? else {
            return Ok(None);
        };
        student.points += points;
        self.sheet.update(&student).await?;
        Ok(Some(student.points))
    }
}

//! Student repository.
//!
//! Student numbers are generated here: `YYYY-NNNNN` where the sequence
//! restarts each enrollment year and continues past deleted rows. The
//! unique index on student_no backstops concurrent enrollments.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{
    grade::{self, Entity as GradeEntity},
    reservation::{self, Entity as ReservationEntity},
    student::{self, Entity as StudentEntity},
};
use crate::domain::{
    format_student_no, next_student_sequence, CreateStudent, Student, UpdateStudent,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Student repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Student>, u64)>;

    async fn update(&self, id: Uuid, changes: UpdateStudent) -> AppResult<Student>;
}

/// SeaORM-backed implementation of StudentRepository.
pub struct StudentStore {
    db: Arc<DatabaseConnection>,
}

impl StudentStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentRepository for StudentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        let result = StudentEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Student::from))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Student>, u64)> {
        let mut query = StudentEntity::find().order_by_asc(student::Column::StudentNo);

        if let Some(term) = params.search_term() {
            query = query.filter(
                Condition::any()
                    .add(student::Column::StudentNo.contains(term))
                    .add(student::Column::FirstName.contains(term))
                    .add(student::Column::LastName.contains(term))
                    .add(student::Column::Email.contains(term)),
            );
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Student::from).collect(), total))
    }

    async fn update(&self, id: Uuid, changes: UpdateStudent) -> AppResult<Student> {
        let existing = StudentEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: student::ActiveModel = existing.into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(middle_name) = changes.middle_name {
            active.middle_name = Set(middle_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(birth_date) = changes.birth_date {
            active.birth_date = Set(birth_date);
        }
        if let Some(course_id) = changes.course_id {
            active.course_id = Set(course_id);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(Student::from(model))
    }
}

// Shared query functions, usable inside transactions.

/// Insert a student with a freshly generated student number.
///
/// The next sequence comes from the highest number issued this year, not
/// a row count, so deletions never cause a number to be reissued. Two
/// racing creates can still draw the same number; the unique index
/// rejects the loser and the service retries.
pub(crate) async fn create_with_number<C: ConnectionTrait>(
    conn: &C,
    data: CreateStudent,
) -> AppResult<Student> {
    let now = chrono::Utc::now();
    let year = now.format("%Y").to_string().parse::<i32>().unwrap_or(0);

    // Zero-padded sequences sort lexicographically, so the last row by
    // student_no carries the year's maximum.
    let last = StudentEntity::find()
        .filter(student::Column::StudentNo.starts_with(format!("{}-", year)))
        .order_by_desc(student::Column::StudentNo)
        .one(conn)
        .await?;

    let sequence = next_student_sequence(last.as_ref().map(|s| s.student_no.as_str()), year);
    let student_no = format_student_no(year, sequence);

    let active_model = student::ActiveModel {
        id: Set(Uuid::new_v4()),
        student_no: Set(student_no),
        first_name: Set(data.first_name),
        middle_name: Set(data.middle_name),
        last_name: Set(data.last_name),
        email: Set(data.email),
        birth_date: Set(data.birth_date),
        course_id: Set(data.course_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(conn).await?;
    Ok(Student::from(model))
}

/// Count rows that would block a non-forced delete.
pub(crate) async fn count_dependents<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<u64> {
    let reservations = ReservationEntity::find()
        .filter(reservation::Column::StudentId.eq(id))
        .count(conn)
        .await?;
    let grades = GradeEntity::find()
        .filter(grade::Column::StudentId.eq(id))
        .count(conn)
        .await?;
    Ok(reservations + grades)
}

/// Delete a student with their reservations and grades. Must run inside a
/// transaction.
pub(crate) async fn cascade_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    GradeEntity::delete_many()
        .filter(grade::Column::StudentId.eq(id))
        .exec(conn)
        .await?;
    ReservationEntity::delete_many()
        .filter(reservation::Column::StudentId.eq(id))
        .exec(conn)
        .await?;

    let result = StudentEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Plain delete for a student with no dependents.
pub(crate) async fn delete_plain<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let result = StudentEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

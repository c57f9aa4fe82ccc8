//! Access-control in two layers: pure predicates over plain data, and
//! raising wrappers that fetch the relations, call the predicate, and turn a
//! denial into `NotEnoughAccessRights`. The predicates stay testable without
//! a database or error control flow.

use tasker_db::Database;
use tasker_db::models::CourseRow;

use crate::error::ApiError;
use crate::identity::{CurrentUser, Identity};

// -- Pure predicates --

/// Public courses are visible to everyone, including anonymous requesters.
/// Private courses are visible to their teacher and subscribed students
/// only; anonymous is never a member.
pub fn can_view_course(course: &CourseRow, identity: &Identity, is_subscribed: bool) -> bool {
    if !course.is_private {
        return true;
    }
    match identity {
        Identity::Anonymous => false,
        Identity::Authenticated(_) => is_course_teacher(course, identity) || is_subscribed,
    }
}

pub fn is_course_teacher(course: &CourseRow, identity: &Identity) -> bool {
    match identity {
        Identity::Anonymous => false,
        Identity::Authenticated(user) => course.teacher_id == user.id.to_string(),
    }
}

/// Solutions come from authenticated students; teachers and anonymous
/// requesters cannot submit. The same rule gates subscription.
pub fn is_acting_student(identity: &Identity) -> bool {
    match identity {
        Identity::Anonymous => false,
        Identity::Authenticated(user) => !user.role.is_teacher(),
    }
}

/// Course creation is open to any teacher account; ownership checks on an
/// existing course go through [`is_course_teacher`] instead.
pub fn is_acting_teacher(identity: &Identity) -> bool {
    match identity {
        Identity::Anonymous => false,
        Identity::Authenticated(user) => user.role.is_teacher(),
    }
}

// -- Raising wrappers --

/// Lesson/task access derives from the ancestor course, so this is the one
/// place that consults the subscription relation.
pub fn ensure_course_access(
    db: &Database,
    course: &CourseRow,
    identity: &Identity,
) -> Result<(), ApiError> {
    let is_subscribed = match identity {
        Identity::Authenticated(user) if course.is_private => {
            db.is_subscribed(&course.id, &user.id.to_string())?
        }
        _ => false,
    };

    if can_view_course(course, identity, is_subscribed) {
        Ok(())
    } else {
        Err(ApiError::NotEnoughAccessRights)
    }
}

pub fn ensure_course_teacher(course: &CourseRow, identity: &Identity) -> Result<(), ApiError> {
    if is_course_teacher(course, identity) {
        Ok(())
    } else {
        Err(ApiError::NotEnoughAccessRights)
    }
}

/// Returns the acting student, for handlers that need the account after the
/// check.
pub fn require_acting_student(identity: &Identity) -> Result<&CurrentUser, ApiError> {
    match identity.user() {
        Some(user) if is_acting_student(identity) => Ok(user),
        _ => Err(ApiError::NotEnoughAccessRights),
    }
}

pub fn require_acting_teacher(identity: &Identity) -> Result<&CurrentUser, ApiError> {
    match identity.user() {
        Some(user) if is_acting_teacher(identity) => Ok(user),
        _ => Err(ApiError::NotEnoughAccessRights),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_types::models::UserRole;
    use uuid::Uuid;

    fn course(teacher_id: &str, is_private: bool) -> CourseRow {
        CourseRow {
            id: Uuid::new_v4().to_string(),
            title: "title".into(),
            description: "description".into(),
            is_private,
            teacher_id: teacher_id.into(),
            created_at: "2026-01-01 00:00:00".into(),
        }
    }

    fn authenticated(id: Uuid, role: UserRole) -> Identity {
        Identity::Authenticated(CurrentUser {
            id,
            username: "user".into(),
            role,
        })
    }

    #[test]
    fn public_course_is_visible_to_anyone() {
        let course = course(&Uuid::new_v4().to_string(), false);
        assert!(can_view_course(&course, &Identity::Anonymous, false));
        assert!(can_view_course(
            &course,
            &authenticated(Uuid::new_v4(), UserRole::Student),
            false
        ));
    }

    #[test]
    fn private_course_requires_membership_or_ownership() {
        let teacher = Uuid::new_v4();
        let course = course(&teacher.to_string(), true);

        assert!(!can_view_course(&course, &Identity::Anonymous, false));

        let stranger = authenticated(Uuid::new_v4(), UserRole::Student);
        assert!(!can_view_course(&course, &stranger, false));
        assert!(can_view_course(&course, &stranger, true));

        let owner = authenticated(teacher, UserRole::Teacher);
        assert!(can_view_course(&course, &owner, false));
    }

    #[test]
    fn course_teacher_is_identity_equality_not_role() {
        let teacher = Uuid::new_v4();
        let course = course(&teacher.to_string(), false);

        assert!(is_course_teacher(&course, &authenticated(teacher, UserRole::Teacher)));
        // A different teacher does not own this course.
        assert!(!is_course_teacher(
            &course,
            &authenticated(Uuid::new_v4(), UserRole::Teacher)
        ));
        assert!(!is_course_teacher(&course, &Identity::Anonymous));
    }

    #[test]
    fn only_authenticated_students_act_as_students() {
        assert!(!is_acting_student(&Identity::Anonymous));
        assert!(!is_acting_student(&authenticated(Uuid::new_v4(), UserRole::Teacher)));
        assert!(is_acting_student(&authenticated(Uuid::new_v4(), UserRole::Student)));
    }
}

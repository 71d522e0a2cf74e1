use uuid::Uuid;

/// The authenticated identity performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

/// Mutable resource, reduced to the identity that controls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User { id: Uuid },
    Movie { owner_id: Uuid },
    Review { author_id: Uuid },
}

impl Resource {
    fn controller(&self) -> Uuid {
        match *self {
            Resource::User { id } => id,
            Resource::Movie { owner_id } => owner_id,
            Resource::Review { author_id } => author_id,
        }
    }
}

/// Single authorization predicate evaluated before every mutating service
/// call. A user edits only what they control (their own record, movies they
/// own, reviews they authored); admins may additionally delete anything.
pub fn can(actor: &Actor, action: Action, resource: &Resource) -> bool {
    if actor.id == resource.controller() {
        return true;
    }
    match action {
        Action::Edit => false,
        Action::Delete => actor.is_admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Uuid) -> Actor {
        Actor {
            id,
            is_admin: false,
        }
    }

    fn admin(id: Uuid) -> Actor {
        Actor { id, is_admin: true }
    }

    #[test]
    fn owner_may_edit_and_delete_own_movie() {
        let owner = Uuid::new_v4();
        let movie = Resource::Movie { owner_id: owner };
        assert!(can(&user(owner), Action::Edit, &movie));
        assert!(can(&user(owner), Action::Delete, &movie));
    }

    #[test]
    fn stranger_may_not_touch_anothers_movie() {
        let movie = Resource::Movie {
            owner_id: Uuid::new_v4(),
        };
        let other = user(Uuid::new_v4());
        assert!(!can(&other, Action::Edit, &movie));
        assert!(!can(&other, Action::Delete, &movie));
    }

    #[test]
    fn review_is_controlled_by_author_not_movie_owner() {
        let author = Uuid::new_v4();
        let review = Resource::Review { author_id: author };
        // the movie's owner is just another user here
        let movie_owner = user(Uuid::new_v4());
        assert!(can(&user(author), Action::Edit, &review));
        assert!(!can(&movie_owner, Action::Edit, &review));
        assert!(!can(&movie_owner, Action::Delete, &review));
    }

    #[test]
    fn user_record_is_self_service_only() {
        let id = Uuid::new_v4();
        let record = Resource::User { id };
        assert!(can(&user(id), Action::Edit, &record));
        assert!(!can(&user(Uuid::new_v4()), Action::Edit, &record));
    }

    #[test]
    fn admin_may_delete_but_not_edit_foreign_resources() {
        let boss = admin(Uuid::new_v4());
        let review = Resource::Review {
            author_id: Uuid::new_v4(),
        };
        let record = Resource::User { id: Uuid::new_v4() };
        assert!(can(&boss, Action::Delete, &review));
        assert!(can(&boss, Action::Delete, &record));
        assert!(!can(&boss, Action::Edit, &review));
        assert!(!can(&boss, Action::Edit, &record));
    }

    #[test]
    fn admin_still_controls_own_resources() {
        let boss = admin(Uuid::new_v4());
        let own = Resource::User { id: boss.id };
        assert!(can(&boss, Action::Edit, &own));
        assert!(can(&boss, Action::Delete, &own));
    }
}

use uuid::Uuid;

/// Identity of whoever performs a mutation, stamped into the audit columns.
///
/// Authentication is not part of this system yet, so most requests run as
/// [`Actor::system`], which stamps `NULL` rather than a made-up id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    id: Option<Uuid>,
}

impl Actor {
    /// Actor with no identity. Audit columns are left `NULL`.
    #[must_use]
    pub const fn system() -> Self {
        Self { id: None }
    }

    /// Actor supplied by an authentication layer.
    #[must_use]
    pub const fn user(id: Uuid) -> Self {
        Self { id: Some(id) }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        self.id
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.id.is_none()
    }
}

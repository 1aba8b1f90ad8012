use uuid::Uuid;

/// The authenticated owner of a request, as vouched for by the upstream proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    /// The ID of the user making the request.
    pub id: Uuid,
}

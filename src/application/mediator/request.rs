//! Request and response sum types.
//!
//! Every command and query is a variant of [`Request`]; its result is the
//! matching variant of [`Response`]. [`Dispatchable`] links each concrete
//! request type to its variant and its typed output, so callers of
//! `Mediator::send` never match on the sum types themselves.

use std::fmt;

use crate::application::errors::AppError;
use crate::application::handlers::meeting::JoinMeetingCommand;
use crate::application::handlers::user::{
    ActivateUserCommand, ChangePasswordCommand, CreateUserCommand, CreateUserResult,
    DeactivateUserCommand, GrantAdminCommand, ListUsersQuery, ListUsersResult,
    RevokeAdminCommand,
};

/// Discriminant of a [`Request`], used as the registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    CreateUser,
    ChangePassword,
    ActivateUser,
    DeactivateUser,
    GrantAdmin,
    RevokeAdmin,
    ListUsers,
    JoinMeeting,
}

impl RequestKind {
    pub const ALL: [RequestKind; 8] = [
        RequestKind::CreateUser,
        RequestKind::ChangePassword,
        RequestKind::ActivateUser,
        RequestKind::DeactivateUser,
        RequestKind::GrantAdmin,
        RequestKind::RevokeAdmin,
        RequestKind::ListUsers,
        RequestKind::JoinMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::CreateUser => "create_user",
            RequestKind::ChangePassword => "change_password",
            RequestKind::ActivateUser => "activate_user",
            RequestKind::DeactivateUser => "deactivate_user",
            RequestKind::GrantAdmin => "grant_admin",
            RequestKind::RevokeAdmin => "revoke_admin",
            RequestKind::ListUsers => "list_users",
            RequestKind::JoinMeeting => "join_meeting",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links a concrete request type to the mediator's sum types.
pub trait Dispatchable: Sized + Send + 'static {
    /// Typed result of handling this request.
    type Output: Send + 'static;

    const KIND: RequestKind;

    fn into_request(self) -> Request;

    /// # Errors
    ///
    /// `RequestMismatch` when `request` is a different kind.
    fn from_request(request: Request) -> Result<Self, AppError>;

    fn into_response(output: Self::Output) -> Response;

    /// # Errors
    ///
    /// `RequestMismatch` when `response` belongs to a different kind.
    fn from_response(response: Response) -> Result<Self::Output, AppError>;
}

macro_rules! requests {
    ($($variant:ident($request:ty) -> $output:ty),+ $(,)?) => {
        /// A fully populated command or query.
        #[derive(Debug, Clone)]
        pub enum Request {
            $($variant($request),)+
        }

        impl Request {
            pub fn kind(&self) -> RequestKind {
                match self {
                    $(Request::$variant(_) => RequestKind::$variant,)+
                }
            }
        }

        /// Result of a dispatched [`Request`].
        #[derive(Debug, Clone)]
        pub enum Response {
            $($variant($output),)+
        }

        impl Response {
            pub fn kind(&self) -> RequestKind {
                match self {
                    $(Response::$variant(_) => RequestKind::$variant,)+
                }
            }
        }

        $(
            impl Dispatchable for $request {
                type Output = $output;

                const KIND: RequestKind = RequestKind::$variant;

                fn into_request(self) -> Request {
                    Request::$variant(self)
                }

                fn from_request(request: Request) -> Result<Self, AppError> {
                    match request {
                        Request::$variant(inner) => Ok(inner),
                        other => Err(AppError::RequestMismatch {
                            expected: RequestKind::$variant.as_str(),
                            actual: other.kind().as_str(),
                        }),
                    }
                }

                fn into_response(output: $output) -> Response {
                    Response::$variant(output)
                }

                fn from_response(response: Response) -> Result<$output, AppError> {
                    match response {
                        Response::$variant(inner) => Ok(inner),
                        other => Err(AppError::RequestMismatch {
                            expected: RequestKind::$variant.as_str(),
                            actual: other.kind().as_str(),
                        }),
                    }
                }
            }
        )+
    };
}

requests! {
    CreateUser(CreateUserCommand) -> CreateUserResult,
    ChangePassword(ChangePasswordCommand) -> (),
    ActivateUser(ActivateUserCommand) -> (),
    DeactivateUser(DeactivateUserCommand) -> (),
    GrantAdmin(GrantAdminCommand) -> (),
    RevokeAdmin(RevokeAdminCommand) -> (),
    ListUsers(ListUsersQuery) -> ListUsersResult,
    JoinMeeting(JoinMeetingCommand) -> (),
}

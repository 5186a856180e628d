use std::fmt;
use strum::Display;

/// Whether a request mutates state or only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MessageKind {
    Command,
    Query,
}

/// A message dispatched through a [`Pipeline`](crate::Pipeline).
///
/// `Output` is the payload carried by a successful `CrudResult`. `NAME` is
/// used in log records, so it should be the request's type name.
pub trait Request: fmt::Debug + Send + Sync + 'static {
    type Output: Send + 'static;

    const NAME: &'static str;
    const KIND: MessageKind;
}

/// A state-changing request.
pub trait Command: Request {}

/// A read-only request.
pub trait Query: Request {}

/// Declares a type as a command.
///
/// ```ignore
/// command!(DeleteTodoList);            // Output = ()
/// command!(CreateTodoList => i64);
/// ```
#[macro_export]
macro_rules! command {
    ($request:ident) => {
        $crate::command!($request => ());
    };
    ($request:ident => $output:ty) => {
        impl $crate::Request for $request {
            type Output = $output;

            const NAME: &'static str = stringify!($request);
            const KIND: $crate::MessageKind = $crate::MessageKind::Command;
        }

        impl $crate::Command for $request {}
    };
}

/// Declares a type as a query.
#[macro_export]
macro_rules! query {
    ($request:ident => $output:ty) => {
        impl $crate::Request for $request {
            type Output = $output;

            const NAME: &'static str = stringify!($request);
            const KIND: $crate::MessageKind = $crate::MessageKind::Query;
        }

        impl $crate::Query for $request {}
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Rename;

    #[derive(Debug)]
    struct Lookup;

    command!(Rename);
    query!(Lookup => Vec<String>);

    fn kind_of<R: Request>() -> MessageKind {
        R::KIND
    }

    #[test]
    fn test_macros_declare_name_and_kind() {
        assert_eq!(Rename::NAME, "Rename");
        assert_eq!(kind_of::<Rename>(), MessageKind::Command);
        assert_eq!(Lookup::NAME, "Lookup");
        assert_eq!(kind_of::<Lookup>(), MessageKind::Query);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MessageKind::Command.to_string(), "Command");
        assert_eq!(MessageKind::Query.to_string(), "Query");
    }
}

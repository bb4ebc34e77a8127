mod auth;
mod convert;
mod live;
mod workspace;

mod document;
mod legacy;
mod markdown;
mod presentation;

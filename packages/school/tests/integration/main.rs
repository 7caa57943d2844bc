mod common;
mod faculty;
mod info;
mod student;

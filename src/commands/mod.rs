pub mod add;
pub mod clear;
pub mod delete;
pub mod done;
pub mod due;
pub mod list;
pub mod mv;
pub mod repeat;
pub mod serve;
pub mod today;

mod controls;
mod details;
mod edit;
mod panels;

pub mod votefiles;

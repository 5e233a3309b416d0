pub mod rubric_file;

pub(crate) mod sale_exercises;

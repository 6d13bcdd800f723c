pub mod imageproc_annotator;

pub mod subject;

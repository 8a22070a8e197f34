pub mod csv_rows;

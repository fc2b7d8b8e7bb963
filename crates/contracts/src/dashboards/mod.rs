pub mod d301_sales_overview;

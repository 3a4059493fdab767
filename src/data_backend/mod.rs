pub mod html_parser;
pub mod maxmanager;
pub mod pdf_page;
pub mod pdf_parser;

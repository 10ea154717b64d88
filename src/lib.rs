/*!
# Digital Glossary

A single-page glossary browser, served over HTTP.

## Overview

Terms and definitions live in a spreadsheet, either a published Google
Sheet (read through its CSV export) or a local CSV/XLSX/ODS file. The
server loads the sheet, keeps only rows whose `Publish_bnry` flag is 1,
sorts them by term ignoring case, and renders a page where readers can
narrow the list by first letter and by a free-text search over terms and
definitions.

## Architecture

### Data
- **sheet**: raw tables from CSV text or a workbook's first worksheet
- **entry**: the `GlossaryEntry` row type and the sheet's column names
- **loader**: pluggable `DataSource` (Google Sheet or local file) and the
  publish-flag filter/sort that turns a raw table into the working set
- **cache**: the working set with its fetch time, reloaded after a TTL

### Filtering
- **filter**: `FilterCriteria` (first letter + query) applied as a pure
  function over the working set

### Web (feature `web`)
- **render**: handlebars page template
- **app**: axum routes and server startup

## Routes

- `/` - Glossary page, filtered by `?letter=` and `?q=`
- `/reset` - Back to the unfiltered page
- `/api/entries` - Same filters, as JSON
- `/health` - Liveness check
- `/static` - Stylesheet
*/

pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod loader;
pub mod sheet;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod render;

pub use cache::*;
pub use config::*;
pub use entry::*;
pub use error::*;
pub use filter::*;
pub use loader::*;

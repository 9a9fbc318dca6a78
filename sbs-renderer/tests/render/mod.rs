mod document;
mod sticky;
mod widgets;

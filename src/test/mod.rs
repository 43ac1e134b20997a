mod codec;
mod end_to_end;
mod sender_go_back_n;
mod support;

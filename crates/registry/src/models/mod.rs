mod link;

pub(crate) use self::link::LinkRow;

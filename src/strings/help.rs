//! # Help Text
//!
//! Help messages for bot commands.
//! Displayed to the user via the `.help` and bare `.class` commands.

pub const MAIN: &str = concat!(
    "**🤖 Classroom Help**\n",
    "Use: .command _args_\n",
    "\n",
    "**🎓 Classes**\n",
    "* class: Academic class creation functionality\n",
    "* help: Show this message\n"
);

pub const CLASS: &str = concat!(
    "**🎓 Class Management**\n",
    "Command group for the manage classes functionality.\n",
    "\n",
    "* class add _[abbrev-number]_: Starts the class creation wizard, optionally with a class ",
    "such as `cpsc-1010` (alias: create)\n",
    "* class archive _channel_: Archive a class channel, administrators only (alias: delete)\n",
    "\n",
    "Examples: `.class add`, `.class add cpsc-1010`\n"
);
